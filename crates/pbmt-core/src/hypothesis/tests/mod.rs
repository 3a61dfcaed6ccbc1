mod concurrency;
mod gaps;
mod heuristics;
