use four_io::{error_kind_to_str, FourFile};
use fourdev::Message;

pub const OLD_MESSAGE: &str = "Old message\n";
pub const NEW_MESSAGE: &str = "New message!\n";

fn report(out: &mut impl std::io::Write, line: &str) -> Result<(), String> {
    writeln!(out, "{line}").map_err(|e| e.to_string())
}

/// Message tester actor: writes a few bytes, then drives probe, set, get
/// and exchange in that order, printing each result
///
/// Stops at the first failing control operation.
///
/// # Errors
///
/// Returns an error if:
/// - The write or any control operation fails
/// - Writing the report fails
pub fn execute(file: &mut FourFile, out: &mut impl std::io::Write) -> Result<(), String> {
    report(out, "test begin!")?;

    let written = embedded_io::Write::write(file, &[b'2'; 3])
        .map_err(|e| format!("Failed to write: {}", error_kind_to_str(e)))?;
    report(out, &format!("written = {written}"))?;

    file.hello()
        .map_err(|e| format!("Failed to probe: {}", error_kind_to_str(e)))?;
    report(out, "result = 0")?;

    if let Err(e) = file.set_message(&Message::from(OLD_MESSAGE)) {
        report(out, "ioctl set message fail")?;
        return Err(error_kind_to_str(e).to_string());
    }

    let msg = match file.get_message() {
        Ok(msg) => msg,
        Err(e) => {
            report(out, "_IOR ioctl get message fail")?;
            return Err(error_kind_to_str(e).to_string());
        }
    };
    report(out, &format!("user_msg: {}", msg.text_lossy()))?;

    let mut msg = Message::from(NEW_MESSAGE);
    if let Err(e) = file.exchange_message(&mut msg) {
        report(out, "_IOWR ioctl exchange message fail")?;
        return Err(error_kind_to_str(e).to_string());
    }
    report(out, &format!("user_msg: {} ", msg.text_lossy()))?;

    tracing::info!("message test done");
    Ok(())
}
