/// Display version information
pub fn execute() {
    println!("approval-gate {}", env!("CARGO_PKG_VERSION"));
    println!("Operator CLI for the approval-gate threshold ledger");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_execute() {
        execute();
    }
}
