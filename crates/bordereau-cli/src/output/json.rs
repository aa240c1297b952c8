use bordereau_core::error::BordereauError;
use serde_json::Value;

pub fn print(value: &Value) -> Result<(), BordereauError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
