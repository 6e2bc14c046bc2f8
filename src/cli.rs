// CLI definitions using clap

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "custom-hid-sim")]
#[command(author, version, about = "Run the custom HID command dispatcher against a simulated host")]
pub struct Cli {
    /// Device configuration file (TOML); defaults apply if absent
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Constant 10-bit analog level returned by the simulated ADC
    #[arg(long, conflicts_with = "sweep", value_parser = clap::value_parser!(u16).range(0..=1023))]
    pub level: Option<u16>,

    /// Drive the simulated ADC with a triangle sweep of this step size
    #[arg(long, value_name = "STEP")]
    pub sweep: Option<u16>,

    /// Leave each reply uncollected, so later replies hit a busy endpoint
    #[arg(long)]
    pub no_read: bool,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Opcodes to send, in hex (e.g. 37, 0x80)
    #[arg(value_parser = parse_opcode)]
    pub opcodes: Vec<u8>,
}

/// Parse a hex byte with optional 0x prefix
pub fn parse_opcode(s: &str) -> Result<u8, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u8::from_str_radix(digits, 16).map_err(|e| format!("invalid opcode '{s}': {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_opcode() {
        assert_eq!(parse_opcode("37"), Ok(0x37));
        assert_eq!(parse_opcode("0x80"), Ok(0x80));
        assert_eq!(parse_opcode("0X11"), Ok(0x11));
        assert!(parse_opcode("zz").is_err());
        assert!(parse_opcode("100").is_err());
    }

    #[test]
    fn test_cli_parses_opcodes() {
        let cli = Cli::try_parse_from(["custom-hid-sim", "--level", "755", "37", "0x11"]).unwrap();
        assert_eq!(cli.level, Some(755));
        assert_eq!(cli.opcodes, vec![0x37, 0x11]);
        assert!(!cli.no_read);
    }

    #[test]
    fn test_cli_rejects_out_of_range_level() {
        assert!(Cli::try_parse_from(["custom-hid-sim", "--level", "2000"]).is_err());
    }
}
