use colored::Colorize;

pub fn print_error_message(error_message: &str) {
    eprintln!("{}", error_message.red());
}

pub fn print_warn_message(warn_message: &str) {
    eprintln!("{}", warn_message.yellow());
}

pub fn print_success_message(success_message: &str) {
    eprintln!("{}", success_message.green());
}
