use super::register::RegisterCode;
use crate::utils::error::JudoError;

pub const SALT_REFILL_MIN_KG: f64 = 0.0;
pub const SALT_REFILL_MAX_KG: f64 = 25.0;

/// Encodes a refill mass as the 4-digit upper-case hex grams value.
pub fn encode_salt_refill(mass_kg: f64) -> Result<String, JudoError> {
    if !mass_kg.is_finite() || !(SALT_REFILL_MIN_KG..=SALT_REFILL_MAX_KG).contains(&mass_kg) {
        return Err(JudoError::ValidationError(format!(
            "Salt refill mass {} kg is outside {}..={} kg",
            mass_kg, SALT_REFILL_MIN_KG, SALT_REFILL_MAX_KG
        )));
    }

    // 25 kg = 25000 g, always fits the register's 2-byte stock field
    let grams = (mass_kg * 1000.0).round() as u16;
    Ok(format!("{:04X}", grams))
}

/// Full command string for the refill write: the salt register code followed by the mass.
pub fn salt_refill_command(mass_kg: f64) -> Result<String, JudoError> {
    let payload = encode_salt_refill(mass_kg)?;
    Ok(format!("{}{}", RegisterCode::Salt.code(), payload))
}
