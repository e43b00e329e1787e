// input_process.rs

use crate::error::OracleError;
use crate::generator::{GenerationResult, IdeaGenerator};
use crate::randomness::RandomSource;

use log::{info, error};

/// Rejects empty or whitespace-only keywords before they reach the generator.
pub fn validate_keyword(raw: &str) -> Result<&str, OracleError> {
    let keyword = raw.trim();
    if keyword.is_empty() {
        return Err(OracleError::EmptyKeyword);
    }
    Ok(keyword)
}

pub fn process_user_input<R>(
    raw: &str,
    generator: &IdeaGenerator,
    rng: &mut R,
) -> Result<GenerationResult, OracleError>
where
    R: RandomSource + ?Sized,
{
    let keyword = validate_keyword(raw)?;
    info!("Processing keyword: {}", keyword);

    match generator.generate(keyword, rng) {
        Ok(result) => {
            info!(
                "Theme '{}' -> {}",
                result.identified_theme, result.generated_idea
            );
            Ok(result)
        }
        Err(e) => {
            error!("Generation failed for '{}': {}", keyword, e);
            Err(e)
        }
    }
}
