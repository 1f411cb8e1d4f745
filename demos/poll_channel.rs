use pt104ctrl::{Channel, DataType, Device, Wires};

#[tokio::main]
async fn main() -> pt104ctrl::Result<()> {
    let mut unit = Device::new()?;
    unit.connect("")?;
    unit.configure_channel(Channel::Ch1, DataType::Pt100, Wires::Four, false);

    loop {
        match unit.get_value(Channel::Ch1, false).await? {
            Some(value) => {
                println!("CH1: {:.3} °C", value);
            }
            None => {
                println!("NO_DATA");
            }
        }
    }
}
