use colored::Colorize;

const BANNER: &str = r#"
                                   _ __ (_) | ___ | |__
              _ __  _ __ ___   __ | '_ \| | |/ _ \| __|
             | '_ \| '_ ` _ \ / _`| |_) | | | (_) | |_
             |_| |_|_| |_| |_|\__,| .__/|_|_|\___/ \__|
                                  |_|
         Simplifying your favorite network mapper ...
"#;

pub(crate) fn banner() {
    println!("{}", BANNER.cyan());
}

pub(crate) fn print_error(message: &str) {
    eprintln!("{}", format!("[!] ERROR: {message}").red());
}

pub(crate) fn print_warning(message: &str) {
    eprintln!("{}", format!("[!] WARNING: {message}").yellow());
}

pub(crate) fn print_success(message: &str) {
    println!("{}", format!("[+] {message}").green());
}
