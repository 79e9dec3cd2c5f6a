//! # Negotiation Demo
//!
//! Prints the reply the negotiator gives for a handful of typical server
//! requests.
//! Run with: `cargo run -p telnet-negotiation --example negotiation_demo`

use telnet_negotiation::{IAC, NegotiationFrame, TelnetCommand, TelnetOption, WindowSize, negotiate};

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

fn main() {
    println!("=== Telnet Negotiation Demo ===\n");

    println!("Window size reported: {}x{}", WindowSize::CLASSIC.width, WindowSize::CLASSIC.height);
    println!("Encoded:              {}\n", hex(&WindowSize::CLASSIC.encode()));

    let requests = [
        (TelnetCommand::DO, TelnetOption::NAWS),
        (TelnetCommand::DO, TelnetOption::TERMINAL_TYPE),
        (TelnetCommand::WILL, TelnetOption::ECHO),
        (TelnetCommand::WILL, TelnetOption::SUPPRESS_GO_AHEAD),
        (TelnetCommand::DONT, TelnetOption::LINEMODE),
        (TelnetCommand::WONT, TelnetOption(200)),
    ];

    for (verb, option) in requests {
        let frame = NegotiationFrame::new(verb.to_byte(), option.to_byte());
        let reply = negotiate(&frame);

        println!("IAC {} {}", verb, option);
        println!("  received: {}", hex(frame.as_bytes()));
        for segment in reply.segments() {
            println!("  reply:    {}", hex(segment));
        }
    }

    println!("\nEvery reply starts with IAC ({:#04X}).", IAC);
}
