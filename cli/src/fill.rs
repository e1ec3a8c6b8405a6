use four_io::{error_kind_to_str, FourFile};
use fourdev::CAPACITY;

/// Length of the payload written by default: one byte short of 5 MiB
pub const DEFAULT_LEN: usize = 5_242_879;

/// Build the fill payload: `'w'` up to one byte short of the device
/// capacity, `'h'` for the rest
#[must_use]
pub fn payload(len: usize) -> Vec<u8> {
    let mut buf = vec![b'w'; len.min(CAPACITY - 1)];
    buf.resize(len, b'h');
    buf
}

/// Fill actor: writes the payload in a single call and reports how many
/// bytes the device accepted
///
/// # Errors
///
/// Returns an error if:
/// - The device rejects the write
/// - Writing the report fails
pub fn execute(
    file: &mut FourFile,
    len: usize,
    out: &mut impl std::io::Write,
) -> Result<usize, String> {
    let buf = payload(len);

    let n = match embedded_io::Write::write(file, &buf) {
        Ok(n) => n,
        Err(e) => {
            let error_msg = error_kind_to_str(e);
            return Err(format!("Failed to write: {error_msg}"));
        }
    };
    tracing::info!(requested = len, accepted = n, "fill done");

    writeln!(out, "{n} bytes written").map_err(|e| e.to_string())?;
    Ok(n)
}
