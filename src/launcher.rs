use std::io;
use std::process::{Command, Stdio};

/// The platform opener and the arguments that precede the URL.
fn opener() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        // The empty string is the window title `start` expects first.
        ("cmd", &["/C", "start", ""])
    } else {
        ("xdg-open", &[])
    }
}

/// Hands `url` to the desktop's browser without waiting for it.
pub fn open_url(url: &str) -> io::Result<()> {
    let (program, args) = opener();
    tracing::info!(url, program, "opening external url");

    Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opener_matches_platform() {
        let (program, args) = opener();
        if cfg!(target_os = "linux") {
            assert_eq!(program, "xdg-open");
            assert!(args.is_empty());
        }
        if cfg!(target_os = "windows") {
            assert_eq!(args, ["/C", "start", ""]);
        }
    }
}
