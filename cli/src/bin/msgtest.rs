//! Control channel tester
//!
//! Runs probe, set, get and exchange against a fresh device and prints
//! each result.

use cli::msgtest;
use four_io::FourFile;
use fourdev::Device;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    cli::init_tracing();

    let device = Device::new()?;
    let mut file = FourFile::open(&device);
    info!("device opened");

    msgtest::execute(&mut file, &mut std::io::stdout())?;

    file.close();
    device.teardown();
    Ok(())
}
