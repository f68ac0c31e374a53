use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use moonlet::bytecode::ProgramBc;
use moonlet::bytecode::disasm::print_bc;
use moonlet::frontend::dot;
use moonlet::frontend::lexer::Lexer;
use moonlet::frontend::token_dumper::TokenDumper;
use moonlet::{Error, compile_source, parse_source, run_program};

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let tokens_only = args.contains(&"--tokens".to_string());
    let no_color = args.contains(&"--no-color".to_string());
    let pretty = args.contains(&"--pretty".to_string());
    let ast = args.contains(&"--ast".to_string());
    let dot_out = args.contains(&"--dot".to_string());
    let bytecode = args.contains(&"--bc".to_string()) || args.contains(&"--bytecode".to_string());
    let emit = args.contains(&"--emit".to_string());
    let help = args.contains(&"--help".to_string()) || args.contains(&"-h".to_string());

    // first non-flag argument is the filename
    let filename = args.iter().skip(1).find(|a| !a.starts_with('-'));

    let filename = match filename {
        Some(filename) if !help => filename,
        _ => {
            print_usage();
            if !help {
                std::process::exit(1);
            }
            return;
        }
    };

    let result = if is_image(filename) {
        run_image(filename)
    } else {
        match fs::read_to_string(filename) {
            Ok(source) => {
                if tokens_only {
                    dump_tokens(&source, no_color, pretty)
                } else if ast {
                    parse_source(&source).map(|program| println!("{:#?}", program))
                } else if dot_out {
                    write_dot(&source, filename)
                } else if bytecode {
                    compile_source(&source).map(|bc| print_bc(&bc))
                } else if emit {
                    emit_image(&source, filename)
                } else {
                    compile_source(&source)
                        .and_then(|bc| run_program(bc, io::stdout()))
                        .map(|_| ())
                }
            }
            Err(e) => {
                eprintln!("Failed to read '{}': {}", filename, e);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn print_usage() {
    println!("MOONLET - a small Lua-like language on a bytecode VM");
    println!();
    println!("Usage:");
    println!("  moonlet <file.lua>            Compile and run a program");
    println!("  moonlet <file.mbc>            Run a compiled bytecode image");
    println!("  moonlet --tokens <file>       Show tokens only (--no-color, --pretty)");
    println!("  moonlet --ast <file>          Print the parsed AST");
    println!("  moonlet --dot <file>          Write the AST as GraphViz to <file>.dot");
    println!("  moonlet --bc <file>           Disassemble the compiled bytecode");
    println!("  moonlet --emit <file>         Write the bytecode image next to <file> (.mbc)");
    println!("  moonlet --help, -h            Show this help");
    println!();
    println!("Set RUST_LOG=debug (or trace) for pipeline logging.");
}

fn is_image(filename: &str) -> bool {
    Path::new(filename).extension().and_then(|e| e.to_str()) == Some("mbc")
}

fn dump_tokens(source: &str, no_color: bool, pretty: bool) -> Result<(), Error> {
    let tokens = Lexer::new(source).tokenize()?;

    let mut dumper = TokenDumper::new();
    if no_color {
        dumper = dumper.no_color();
    }
    if pretty {
        dumper = dumper.pretty();
    }
    dumper.dump(&tokens);
    Ok(())
}

fn write_dot(source: &str, filename: &str) -> Result<(), Error> {
    let program = parse_source(source)?;
    let path = dot_path(Path::new(filename));
    fs::write(&path, dot::render(&program))?;
    log::debug!("wrote {}", path.display());
    Ok(())
}

/// `prog.lua` dumps to `prog.lua.dot`.
fn dot_path(source: &Path) -> PathBuf {
    let mut path = source.as_os_str().to_owned();
    path.push(".dot");
    PathBuf::from(path)
}

fn emit_image(source: &str, filename: &str) -> Result<(), Error> {
    let bc = compile_source(source)?;
    let path = Path::new(filename).with_extension("mbc");
    fs::write(&path, bc.to_bytes()?)?;
    log::debug!("wrote {} ({} code objects)", path.display(), bc.code.len());
    Ok(())
}

fn run_image(filename: &str) -> Result<(), Error> {
    let bytes = fs::read(filename)?;
    let bc = ProgramBc::from_bytes(&bytes)?;
    run_program(bc, io::stdout())?;
    Ok(())
}
