use clap::Parser;

#[derive(Debug, Clone, Copy)]
enum ResponseMode {
    Json,
    Stdout,
}

mod commands;
mod output;

use commands::generate;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "gostamp")]
#[command(version = VERSION)]
#[command(about = "Generate Go code by rewriting a template package with rename directives")]
#[command(after_help = "Example:\n  gostamp --template ./mymap - \\\n    \"NewMyMap => NewFloat32Map, MyMap => Float32Map, Float32Map:int => float32, Float32Map.Rm:string => bytes.Buffer\"")]
struct Cli {
    #[command(flatten)]
    generate: generate::GenerateArgs,
}

fn response_mode(args: &generate::GenerateArgs) -> ResponseMode {
    if args.is_stdout() {
        ResponseMode::Stdout
    } else {
        ResponseMode::Json
    }
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    match response_mode(&cli.generate) {
        ResponseMode::Stdout => match generate::run_raw(cli.generate) {
            Ok((content, exit_code)) => {
                print!("{}", content);
                std::process::ExitCode::from(exit_code_to_u8(exit_code))
            }
            Err(err) => {
                let exit_code = output::exit_code_for_error(err.code);
                let _ = output::print_result::<serde_json::Value>(Err(err));
                std::process::ExitCode::from(exit_code_to_u8(exit_code))
            }
        },
        ResponseMode::Json => {
            let (json_result, exit_code) =
                output::map_cmd_result_to_json(generate::run(cli.generate));
            let _ = output::print_json_result(json_result);
            std::process::ExitCode::from(exit_code_to_u8(exit_code))
        }
    }
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
