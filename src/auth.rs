use anyhow::{Result, bail};
use std::io::{self, BufRead, IsTerminal};
use zeroize::Zeroizing;

pub const PASSWORD_ENV: &str = "SALTKDF_PASSWORD";

/// Reads the password from `SALTKDF_PASSWORD`, piped stdin, or a TTY prompt,
/// in that order.
pub fn read_password() -> Result<Zeroizing<String>> {
    //  SALTKDF_PASSWORD="supersecret" saltkdf derive --seed alice
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        let pw = Zeroizing::new(pw);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    //  printf "%s" "$PW" | saltkdf derive --seed alice
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().lock().read_line(&mut buf)?;
        trim_newline(&mut buf);

        if !buf.is_empty() {
            return Ok(buf);
        }
    }

    if io::stdin().is_terminal() {
        let pw = Zeroizing::new(rpassword::prompt_password("Password: ")?);
        if !pw.is_empty() {
            return Ok(pw);
        }
    }

    bail!("No password provided")
}

fn trim_newline(s: &mut String) {
    while s.ends_with('\n') || s.ends_with('\r') {
        s.pop();
    }
}
