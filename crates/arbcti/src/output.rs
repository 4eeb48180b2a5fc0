use std::io::IsTerminal;
use std::net::SocketAddr;

use arbcti_msg::{ChannelStatus, CommandFeedback};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_statuses(statuses: &[ChannelStatus], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            // Report the 1-based channel number the user asked for.
            let out: Vec<ChannelStatus> = statuses
                .iter()
                .cloned()
                .map(|mut status| {
                    status.channel += 1;
                    status
                })
                .collect();
            print_json(&out);
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec![
                    "CHANNEL", "STATUS", "SCHEDULE", "TEST", "VOLTAGE (V)", "CURRENT (A)",
                    "POWER (W)", "TEST TIME (s)",
                ]);
            for s in statuses {
                table.add_row(vec![
                    (s.channel + 1).to_string(),
                    s.status.clone(),
                    s.schedule.clone(),
                    s.testname.clone(),
                    format!("{:.4}", s.voltage_v),
                    format!("{:.4}", s.current_a),
                    format!("{:.4}", s.power_w),
                    format!("{:.1}", s.test_time_s),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for s in statuses {
                println!("Channel {}:", s.channel + 1);
                println!("  Status:    {}", s.status);
                println!("  Schedule:  {}", s.schedule);
                println!("  Test:      {}", s.testname);
                println!("  Voltage:   {:.4} V", s.voltage_v);
                println!("  Current:   {:.4} A", s.current_a);
                println!("  Power:     {:.4} W", s.power_w);
                println!("  Test time: {:.1} s", s.test_time_s);
                if !s.aux_voltage.is_empty() {
                    println!("  Aux V:     {:?}", s.aux_voltage);
                }
                if !s.aux_temperature.is_empty() {
                    println!("  Aux T:     {:?}", s.aux_temperature);
                }
            }
        }
    }
}

#[derive(Serialize)]
struct FeedbackOutput<'a> {
    operation: &'a str,
    channel: i64,
    result: &'a str,
    success: bool,
}

pub fn print_feedback(operation: &str, feedback: &CommandFeedback, format: OutputFormat) {
    let out = FeedbackOutput {
        operation,
        channel: feedback.channel + 1,
        result: &feedback.result,
        success: feedback.is_success(),
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_header(vec!["OPERATION", "CHANNEL", "RESULT"])
                .add_row(vec![
                    out.operation.to_string(),
                    out.channel.to_string(),
                    out.result.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{} on channel {}: {}", out.operation, out.channel, out.result);
        }
    }
}

#[derive(Serialize)]
struct SpooferOutput {
    addr: String,
    port: u16,
    num_channels: usize,
}

pub fn print_spoofer_started(addr: SocketAddr, num_channels: usize, format: OutputFormat) {
    let out = SpooferOutput {
        addr: addr.to_string(),
        port: addr.port(),
        num_channels,
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!(
                "Spoofer listening on {} with {} channels (Ctrl-C to stop)",
                out.addr, out.num_channels
            );
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
