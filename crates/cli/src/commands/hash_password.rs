//! `ragguard hash-password`: print an Argon2 PHC string.

use ragguard_security::PasswordHasher;

pub fn run(password: &str) -> Result<(), Box<dyn std::error::Error>> {
    if password.is_empty() {
        return Err("password must not be empty".into());
    }
    let hash = PasswordHasher::new()?.hash(password)?;
    println!("{hash}");
    Ok(())
}
