use std::fs;
use std::process;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

pub fn settings_export() {
    print!("{}", pbmt_core::settings::default_toml());
}

pub fn settings_validate(file: &str) {
    let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
    let s = die!(
        pbmt_core::settings::parse_settings_toml(&content),
        "Error: {}"
    );
    println!(
        "OK: unknown_words.drop={}, table.score_names={}, weights={}",
        s.unknown_words.drop,
        s.table.score_names.len(),
        s.weights.len()
    );
}
