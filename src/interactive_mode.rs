use crate::generator::IdeaGenerator;
use crate::input_process::process_user_input;
use crate::randomness::RandomSource;

use log::{info, error};
use std::io::{self, BufRead, Write};

const EXIT_WORDS: [&str; 3] = ["sair", "exit", "quit"];

/// Console loop: one keyword per line until an exit word, an empty line or EOF.
pub fn run_interactive_mode<I, O, R>(
    input: I,
    mut output: O,
    generator: &IdeaGenerator,
    rng: &mut R,
) -> io::Result<()>
where
    I: BufRead,
    O: Write,
    R: RandomSource + ?Sized,
{
    let mut lines = input.lines();
    loop {
        write!(output, "\nDigite uma keyword: ")?;
        output.flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let keyword = line.trim();
        if keyword.is_empty() || EXIT_WORDS.contains(&keyword.to_lowercase().as_str()) {
            info!("User requested exit");
            break;
        }

        match process_user_input(keyword, generator, rng) {
            Ok(result) => {
                writeln!(output, "\nResultado para '{}' [{}]:", keyword, result.identified_theme)?;
                writeln!(output, "{}", result.generated_idea)?;
                writeln!(output, "{}", result.distortion_factor)?;
            }
            Err(e) => {
                error!("Error processing user input: {}", e);
                writeln!(output, "Erro: {}", e)?;
            }
        }
    }

    writeln!(output, "\nObrigado por consultar o Oráculo Alucinado!")?;
    Ok(())
}
