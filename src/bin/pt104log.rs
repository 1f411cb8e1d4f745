#![deny(clippy::unwrap_used)]

//! Fixed-interval sampling recorder: configures a set of channels, polls
//! them and appends every reading to a CSV file until the requested test
//! duration has elapsed or Ctrl-C is pressed.

use chrono::Local;
use clap::{arg, command, value_parser};
use pt104ctrl::port::usb::UsbPt104Library;
use pt104ctrl::{Channel, DataType, Device, Error, Wires};
use std::path::PathBuf;
use std::process::exit;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

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
        .arg(
            arg!(
                -c --channel <CHANNEL> ... "Channel(s) to record"
            )
            .default_values(["1"])
            .value_parser(value_parser!(Channel)),
        )
        .arg(
            arg!(
                --"type" <TYPE> "Sensor/data type for all recorded channels"
            )
            .default_value("pt100")
            .value_parser(value_parser!(DataType)),
        )
        .arg(
            arg!(
                --wires <WIRES> "Number of sensor leads"
            )
            .default_value("4")
            .value_parser(value_parser!(Wires)),
        )
        .arg(
            arg!(
                -i --interval <SECONDS> "Sampling interval"
            )
            .default_value("1.0")
            .value_parser(value_parser!(f64)),
        )
        .arg(
            arg!(
                -t --duration <SECONDS> "Test duration"
            )
            .default_value("120")
            .value_parser(value_parser!(u64)),
        )
        .arg(
            arg!(
                -o --output <PATH> "CSV output path"
            )
            .required(false)
            .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(
                -n --notes <TEXT> "Free-form note stored in the file preamble"
            )
            .required(false),
        )
        .get_matches();

    if let Err(e) = record(&matches).await {
        eprintln!("{}", e);
        exit(-1);
    }
}

async fn record(matches: &clap::ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let serial = matches
        .get_one::<String>("serial")
        .map(String::as_str)
        .unwrap_or_default();
    let channels: Vec<Channel> = matches
        .get_many::<Channel>("channel")
        .expect("Parameter has a default")
        .copied()
        .collect();
    let data_type = *matches
        .get_one::<DataType>("type")
        .expect("Parameter has a default");
    let wires = *matches
        .get_one::<Wires>("wires")
        .expect("Parameter has a default");
    let interval = *matches
        .get_one::<f64>("interval")
        .expect("Parameter has a default");
    let duration = *matches
        .get_one::<u64>("duration")
        .expect("Parameter has a default");
    let path = match matches.get_one::<PathBuf>("output") {
        Some(path) => path.clone(),
        None => PathBuf::from(format!(
            "pt104_readings_{}.csv",
            Local::now().format("%d%b%Y_%H%M")
        )),
    };
    let notes = matches
        .get_one::<String>("notes")
        .map(String::as_str)
        .unwrap_or("");

    let mut device = match matches.get_one::<PathBuf>("library") {
        Some(library) => Device::with_port(Box::new(UsbPt104Library::load_from(library)?)),
        None => Device::new()?,
    };

    eprintln!("waiting for connection...");
    device.connect(serial)?;
    eprintln!("device connected");
    for channel in &channels {
        device.configure_channel(*channel, data_type, wires, false);
    }

    let mut writer = csv::Writer::from_path(&path)?;
    writer.write_record([format!("Date and Time: {}", Local::now())])?;
    writer.write_record([format!("Sampling Rate: {} (s)", interval)])?;
    writer.write_record([format!("Notes: {}", notes)])?;
    writer.write_record([""])?;
    let mut header = vec![
        "Sample Number".to_string(),
        "Time Elapsed (s)".to_string(),
        "Time Elapsed (h)".to_string(),
    ];
    for channel in &channels {
        header.push(format!("{} ({})", channel, data_type));
    }
    writer.write_record(&header)?;

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_cancel.cancel();
        }
    });

    let start = Instant::now();
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(interval));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    ticker.tick().await; // first tick fires immediately

    let mut sample = 0u64;
    'sampling: while start.elapsed() <= Duration::from_secs(duration) {
        tokio::select! {
            _ = cancel.cancelled() => break 'sampling,
            _ = ticker.tick() => {}
        }

        let elapsed = start.elapsed().as_secs_f64();
        let mut record = vec![
            sample.to_string(),
            format!("{:.2}", elapsed),
            format!("{:.4}", elapsed / 3600.0),
        ];
        for channel in &channels {
            let value = match device.get_value_with_cancel(*channel, false, &cancel).await {
                Ok(value) => value,
                Err(Error::Cancelled) => break 'sampling,
                Err(err) => {
                    device.disconnect();
                    return Err(err.into());
                }
            };
            record.push(match value {
                Some(value) => format!("{:.3}", value),
                None => "NO_DATA".to_string(),
            });
        }
        println!("{}", record.join(",  "));
        writer.write_record(&record)?;
        writer.flush()?;
        sample += 1;
    }

    device.disconnect();
    eprintln!("recording complete: {}", path.display());
    Ok(())
}
