use epiwave::runner::run_with_args;

fn main() {
    match run_with_args() {
        Ok(summary) => println!("{summary}"),
        Err(e) => {
            eprintln!("epiwave: {e}");
            std::process::exit(1);
        }
    }
}
