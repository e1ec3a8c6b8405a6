//! Bulk filler
//!
//! Writes a payload longer than the device in one call and reports how many
//! bytes were accepted. An optional first argument sets the payload length.

use cli::fill::{self, DEFAULT_LEN};
use four_io::FourFile;
use fourdev::Device;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    cli::init_tracing();

    let len = match std::env::args().nth(1) {
        Some(arg) => arg.parse::<usize>()?,
        None => DEFAULT_LEN,
    };

    let device = Device::new()?;
    let mut file = FourFile::open(&device);
    info!(len, "filling device");

    fill::execute(&mut file, len, &mut std::io::stdout())?;

    file.close();
    device.teardown();
    Ok(())
}
