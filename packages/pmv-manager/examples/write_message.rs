use std::{net::IpAddr, time::Duration};

use log::{error, info};
use pmv_manager::{
    ClientError, PmvClient,
    protocol::{DeviceAddress, Style},
};

fn main() -> Result<(), ClientError> {
    simplelog::TermLogger::init(
        log::LevelFilter::Debug,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )
    .unwrap();

    let ip: IpAddr = std::env::args()
        .nth(1)
        .as_deref()
        .unwrap_or("127.0.0.1")
        .parse()
        .expect("first argument must be the sign's IP address");
    let text = std::env::args().nth(2).unwrap_or_else(|| "RALLENTARE".to_string());

    let client =
        PmvClient::new(DeviceAddress::new(0x05), ip).with_timeout(Duration::from_millis(1000));

    if !client.test()? {
        error!("Sign at {} rejected the test command", client.endpoint());
        return Ok(());
    }

    // Show message 7 on a single page until told otherwise.
    client.set_to_force_mode()?;
    client.init_page(7, [255, 0, 0, 0, 0])?;
    client.write_message(0, 7, 0, Style::Blinking, text)?;

    let rows = client.get_rows_number()?;
    info!("Sign has {} rows", rows);

    for row in 0..rows.min(10) as u8 {
        let (style, text) = client.get_message(row, 7, 0)?;
        info!("Row {}: {:?} ({})", row, text, style);
    }

    Ok(())
}
