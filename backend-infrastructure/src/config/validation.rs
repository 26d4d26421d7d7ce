use anyhow::{anyhow, Result};

pub fn validate_bind_addr(value: &str) -> Result<()> {
    value
        .parse::<std::net::SocketAddr>()
        .map_err(|err| anyhow!("invalid bind_addr '{}': {}", value, err))?;
    Ok(())
}

pub fn validate_schedule(hour: u32, minute: u32) -> Result<()> {
    if hour > 23 || minute > 59 {
        return Err(anyhow!("cleanup_hour or cleanup_minute out of range"));
    }
    Ok(())
}
