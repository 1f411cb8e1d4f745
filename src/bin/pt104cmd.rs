#![deny(clippy::unwrap_used)]

use clap::{arg, command, value_parser};
use pt104ctrl::port::usb::UsbPt104Library;
use pt104ctrl::{Channel, CommunicationType, DataType, Device, Error, Result, Wires};
use std::fmt;
use std::path::PathBuf;
use std::process::exit;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Copy, Clone)]
pub enum OutputFormat {
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl clap::ValueEnum for OutputFormat {
    fn value_variants<'a>() -> &'a [Self] {
        &[Self::Text, Self::Json]
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(match self {
            Self::Text => clap::builder::PossibleValue::new("text"),
            Self::Json => clap::builder::PossibleValue::new("json"),
        })
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let matches = command!() // requires `cargo` feature
        .arg(
            arg!(
                -s --serial <SERIAL> "Batch and serial of the unit, empty picks any attached unit"
            )
            .default_value("")
            .required(false),
        )
        .arg(
            arg!(
                -l --library <PATH> "Explicit path to the usbpt104 shared library"
            )
            .required(false)
            .value_parser(value_parser!(PathBuf)),
        )
        .subcommand(
            clap::Command::new("discover")
                .about("List attached units")
                .arg(
                    arg!([interface] "Transport to enumerate")
                        .value_parser(value_parser!(CommunicationType)),
                ),
        )
        .subcommand(clap::Command::new("info").about("Unit information").arg(
            arg!(--"format" <fmt> "Output format").value_parser(value_parser!(OutputFormat)),
        ))
        .subcommand(
            clap::Command::new("read")
                .about("Configure a channel and read it")
                .arg(arg!(<channel> "Channel number").value_parser(value_parser!(Channel)))
                .arg(
                    arg!(--"type" <TYPE> "Sensor/data type")
                        .default_value("pt100")
                        .value_parser(value_parser!(DataType)),
                )
                .arg(
                    arg!(--wires <WIRES> "Number of sensor leads")
                        .default_value("4")
                        .value_parser(value_parser!(Wires)),
                )
                .arg(arg!(--filter "Enable the low pass filter"))
                .arg(arg!(--raw "Print the unscaled ADC code"))
                .arg(arg!(--"loop" "Poll the channel forever"))
                .arg(
                    arg!(--"format" <fmt> "Output format")
                        .value_parser(value_parser!(OutputFormat)),
                ),
        )
        .subcommand(
            clap::Command::new("mains")
                .about("Local mains frequency for noise rejection")
                .arg(arg!(<freq> "Mains frequency in Hz").value_parser(["50", "60"])),
        )
        .subcommand_required(true)
        .get_matches();

    match handle_args(&matches).await {
        Ok(()) => {}
        Err(e) => match e {
            Error::Library(err) => {
                eprintln!("Cannot load the usbpt104 driver library: {}", err);
                eprintln!("Is the PicoSDK installed?");
                exit(-1);
            }
            Error::Open(status) => {
                eprintln!(
                    "Cannot open the unit (driver status {:#010x}), is it attached?",
                    status
                );
                exit(-1);
            }
            Error::Enumerate(status) => {
                eprintln!("Enumeration failed with driver status {:#010x}", status);
                exit(-1);
            }
            Error::Cancelled => {
                eprintln!("Aborted");
                exit(-2);
            }
            err => {
                eprintln!("{}", err);
                exit(-1);
            }
        },
    }
}

fn new_device(matches: &clap::ArgMatches) -> Result<Device> {
    match matches.get_one::<PathBuf>("library") {
        Some(path) => Ok(Device::with_port(Box::new(UsbPt104Library::load_from(
            path,
        )?))),
        None => Device::new(),
    }
}

async fn handle_args(matches: &clap::ArgMatches) -> Result<()> {
    let serial = matches
        .get_one::<String>("serial")
        .map(String::as_str)
        .unwrap_or_default();

    match matches.subcommand() {
        // Device enumeration, no session needed
        Some(("discover", args)) => {
            let interface = args
                .get_one::<CommunicationType>("interface")
                .copied()
                .unwrap_or(CommunicationType::Usb);
            let device = new_device(matches)?;
            let devices = device.discover(interface)?;
            if devices.is_empty() {
                println!("No units found");
            } else {
                println!("{}", devices);
            }
        }
        // Unit information snapshot
        Some(("info", args)) => {
            let mut device = new_device(matches)?;
            device.connect(serial)?;
            match device.get_unit_info() {
                Some(info) => match args.get_one::<OutputFormat>("format") {
                    Some(OutputFormat::Json) => {
                        println!(
                            "{}",
                            serde_json::to_string_pretty(&info)
                                .expect("Unit info is always serializable")
                        );
                    }
                    _ => println!("{}", info),
                },
                None => eprintln!("Unit info not available"),
            }
            device.disconnect();
        }
        // Channel configuration + reading
        Some(("read", args)) => {
            let channel = *args
                .get_one::<Channel>("channel")
                .expect("Requires channel parameter");
            let data_type = *args
                .get_one::<DataType>("type")
                .expect("Parameter has a default");
            let wires = *args
                .get_one::<Wires>("wires")
                .expect("Parameter has a default");
            let filter = args.get_flag("filter");
            let raw = args.get_flag("raw");
            let fmt = args
                .get_one::<OutputFormat>("format")
                .copied()
                .unwrap_or(OutputFormat::Text);

            let mut device = new_device(matches)?;
            device.connect(serial)?;
            device.configure_channel(channel, data_type, wires, filter);

            // Ctrl-C cancels the conversion wait instead of killing the
            // process mid-call.
            let cancel = CancellationToken::new();
            let signal_cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    signal_cancel.cancel();
                }
            });

            loop {
                let value = match device.get_value_with_cancel(channel, raw, &cancel).await {
                    Ok(value) => value,
                    Err(Error::Cancelled) => break,
                    Err(err) => {
                        device.disconnect();
                        return Err(err);
                    }
                };
                print_reading(channel, value, fmt);
                if !args.get_flag("loop") {
                    break;
                }
            }
            device.disconnect();
        }
        // Mains frequency
        Some(("mains", args)) => {
            let freq = args
                .get_one::<String>("freq")
                .expect("Requires freq parameter");
            let mut device = new_device(matches)?;
            device.connect(serial)?;
            if device.set_mains(freq == "60")? {
                println!("OK");
            } else {
                eprintln!("Mains setting was not accepted");
            }
            device.disconnect();
        }
        _ => unreachable!(),
    }

    Ok(())
}

fn print_reading(channel: Channel, value: Option<f64>, fmt: OutputFormat) {
    match fmt {
        OutputFormat::Text => match value {
            Some(value) => println!("{}: {:.3}", channel, value),
            None => println!("{}: NO_DATA", channel),
        },
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({ "channel": channel, "value": value })
            );
        }
    }
}
