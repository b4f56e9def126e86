pub fn run() -> anyhow::Result<()> {
    println!("impostor {}", env!("CARGO_PKG_VERSION"));
    println!("Game session store with rolling transcript summaries");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_output() {
        assert!(run().is_ok());
    }
}
