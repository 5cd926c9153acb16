use std::process::ExitCode;

fn main() -> ExitCode {
    match fieldwork_fit_step::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
