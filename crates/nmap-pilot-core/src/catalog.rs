//! Declarative scan catalog: every menu category maps to a title, a set of
//! options, and whether the driver should offer a timing preset afterwards.
//! The interactive shell is a thin driver over this table, so flag
//! construction stays independently testable.

use serde::Serialize;

/// How an option turns user choices into nmap flags.
#[derive(Debug, Clone, Copy)]
pub enum FlagSpec {
    /// A fixed flag sequence, no further input needed.
    Fixed(&'static [&'static str]),
    /// One extra piece of input, rendered through `build`.
    Prompted {
        prompt: &'static str,
        build: fn(&str) -> Vec<String>,
    },
    /// Raw whitespace-separated flags typed by the user.
    FreeForm { prompt: &'static str },
}

impl FlagSpec {
    /// Prompt text when the spec needs an extra line of input.
    pub fn needs_input(&self) -> Option<&'static str> {
        match self {
            FlagSpec::Fixed(_) => None,
            FlagSpec::Prompted { prompt, .. } | FlagSpec::FreeForm { prompt } => Some(prompt),
        }
    }

    /// Resolve the spec into concrete flags. `input` is ignored for fixed
    /// specs and treated as empty when absent.
    pub fn resolve(&self, input: Option<&str>) -> Vec<String> {
        match self {
            FlagSpec::Fixed(flags) => flags.iter().map(|f| f.to_string()).collect(),
            FlagSpec::Prompted { build, .. } => build(input.unwrap_or("").trim()),
            FlagSpec::FreeForm { .. } => input
                .unwrap_or("")
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }
}

/// One selectable entry inside a category.
#[derive(Debug, Clone, Copy)]
pub struct ScanOption {
    pub label: &'static str,
    /// Raw-socket techniques need an elevated process; checked by the caller
    /// before the runner is ever invoked.
    pub requires_root: bool,
    pub flags: FlagSpec,
}

/// A top-level menu category.
#[derive(Debug, Clone, Copy)]
pub struct ScanCategory {
    pub id: &'static str,
    pub title: &'static str,
    /// Quick-scan presets embed their own timing, so the driver skips the
    /// timing prompt for them.
    pub prompt_timing: bool,
    pub options: &'static [ScanOption],
}

fn version_intensity(input: &str) -> Vec<String> {
    vec!["-sV".into(), format!("--version-intensity={input}")]
}

fn max_os_tries(input: &str) -> Vec<String> {
    vec!["-O".into(), format!("--max-os-tries={input}")]
}

fn custom_script(input: &str) -> Vec<String> {
    vec!["--script".into(), input.into()]
}

fn mtu_size(input: &str) -> Vec<String> {
    vec!["--mtu".into(), input.into()]
}

fn decoy_addresses(input: &str) -> Vec<String> {
    vec!["-D".into(), input.into()]
}

fn spoof_source(input: &str) -> Vec<String> {
    vec!["-S".into(), input.into()]
}

fn spoof_source_port(input: &str) -> Vec<String> {
    vec!["--source-port".into(), input.into()]
}

fn data_length(input: &str) -> Vec<String> {
    vec!["--data-length".into(), input.into()]
}

fn traceroute_port(input: &str) -> Vec<String> {
    vec!["--traceroute-port".into(), input.into()]
}

fn max_hops(input: &str) -> Vec<String> {
    vec!["--max-hops".into(), input.into()]
}

pub const CATALOG: &[ScanCategory] = &[
    ScanCategory {
        id: "host-discovery",
        title: "Host Discovery",
        prompt_timing: true,
        options: &[
            ScanOption {
                label: "ARP Scan (-PR)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-PR"]),
            },
            ScanOption {
                label: "TCP SYN Ping (-PS)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-PS"]),
            },
            ScanOption {
                label: "TCP ACK Ping (-PA)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-PA"]),
            },
            ScanOption {
                label: "UDP Ping (-PU)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-PU"]),
            },
            ScanOption {
                label: "ICMP Echo Ping (-PE)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-PE"]),
            },
        ],
    },
    ScanCategory {
        id: "port-scanning",
        title: "Port Scanning",
        prompt_timing: true,
        options: &[
            ScanOption {
                label: "TCP SYN Scan (-sS)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-sS"]),
            },
            ScanOption {
                label: "TCP Connect Scan (-sT)",
                requires_root: false,
                flags: FlagSpec::Fixed(&["-sT"]),
            },
            ScanOption {
                label: "UDP Scan (-sU)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-sU"]),
            },
            ScanOption {
                label: "NULL Scan (-sN)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-sN"]),
            },
            ScanOption {
                label: "FIN Scan (-sF)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-sF"]),
            },
            ScanOption {
                label: "Xmas Scan (-sX)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-sX"]),
            },
        ],
    },
    ScanCategory {
        id: "service-detection",
        title: "Service/Version Detection",
        prompt_timing: true,
        options: &[
            ScanOption {
                label: "Basic Version Detection (-sV)",
                requires_root: false,
                flags: FlagSpec::Fixed(&["-sV"]),
            },
            ScanOption {
                label: "Version Intensity (--version-intensity <0-9>)",
                requires_root: false,
                flags: FlagSpec::Prompted {
                    prompt: "Enter intensity (0-9):",
                    build: version_intensity,
                },
            },
            ScanOption {
                label: "Light Mode (--version-light)",
                requires_root: false,
                flags: FlagSpec::Fixed(&["-sV", "--version-light"]),
            },
            ScanOption {
                label: "All-out Detection (--version-all)",
                requires_root: false,
                flags: FlagSpec::Fixed(&["-sV", "--version-all"]),
            },
        ],
    },
    ScanCategory {
        id: "os-detection",
        title: "OS Detection",
        prompt_timing: true,
        options: &[
            ScanOption {
                label: "Enable OS Detection (-O)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-O"]),
            },
            ScanOption {
                label: "Max OS Tries (--max-os-tries <number>)",
                requires_root: true,
                flags: FlagSpec::Prompted {
                    prompt: "Enter max OS tries (1-9):",
                    build: max_os_tries,
                },
            },
        ],
    },
    ScanCategory {
        id: "script-scanning",
        title: "Script Scanning (NSE)",
        prompt_timing: true,
        options: &[
            ScanOption {
                label: "Default Scripts (-sC)",
                requires_root: false,
                flags: FlagSpec::Fixed(&["-sC"]),
            },
            ScanOption {
                label: "Vulnerability Detection (--script vuln)",
                requires_root: false,
                flags: FlagSpec::Fixed(&["--script", "vuln"]),
            },
            ScanOption {
                label: "Exploit Detection (--script exploit)",
                requires_root: false,
                flags: FlagSpec::Fixed(&["--script", "exploit"]),
            },
            ScanOption {
                label: "Safe Scripts (--script safe)",
                requires_root: false,
                flags: FlagSpec::Fixed(&["--script", "safe"]),
            },
            ScanOption {
                label: "Custom Script (--script <name/path>)",
                requires_root: false,
                flags: FlagSpec::Prompted {
                    prompt: "Enter script name/path:",
                    build: custom_script,
                },
            },
        ],
    },
    ScanCategory {
        id: "firewall-evasion",
        title: "Firewall/IDS Evasion",
        prompt_timing: true,
        options: &[
            ScanOption {
                label: "Fragment Packets (-f)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-f"]),
            },
            ScanOption {
                label: "Specify MTU (--mtu <size>)",
                requires_root: true,
                flags: FlagSpec::Prompted {
                    prompt: "Enter MTU size (e.g., 24):",
                    build: mtu_size,
                },
            },
            ScanOption {
                label: "Decoy IPs (-D <decoy1,decoy2>)",
                requires_root: true,
                flags: FlagSpec::Prompted {
                    prompt: "Enter decoy IPs (comma-separated):",
                    build: decoy_addresses,
                },
            },
            ScanOption {
                label: "Spoof Source IP (-S <ip>)",
                requires_root: true,
                flags: FlagSpec::Prompted {
                    prompt: "Enter source IP to spoof:",
                    build: spoof_source,
                },
            },
            ScanOption {
                label: "Spoof Source Port (--source-port <port>)",
                requires_root: true,
                flags: FlagSpec::Prompted {
                    prompt: "Enter source port to spoof:",
                    build: spoof_source_port,
                },
            },
            ScanOption {
                label: "Append Random Data (--data-length <bytes>)",
                requires_root: true,
                flags: FlagSpec::Prompted {
                    prompt: "Enter data length (bytes):",
                    build: data_length,
                },
            },
        ],
    },
    ScanCategory {
        id: "traceroute",
        title: "Traceroute",
        prompt_timing: true,
        options: &[
            ScanOption {
                label: "Enable Traceroute (--traceroute)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["--traceroute"]),
            },
            ScanOption {
                label: "Traceroute Port (--traceroute-port <port>)",
                requires_root: true,
                flags: FlagSpec::Prompted {
                    prompt: "Enter traceroute port:",
                    build: traceroute_port,
                },
            },
            ScanOption {
                label: "Max Hops (--max-hops <number>)",
                requires_root: true,
                flags: FlagSpec::Prompted {
                    prompt: "Enter max hops:",
                    build: max_hops,
                },
            },
        ],
    },
    ScanCategory {
        id: "aggressive",
        title: "Aggressive Scan",
        prompt_timing: true,
        options: &[ScanOption {
            label: "Enable Aggressive Mode (-A)",
            requires_root: true,
            flags: FlagSpec::Fixed(&["-A"]),
        }],
    },
    ScanCategory {
        id: "custom",
        title: "Custom Scan",
        prompt_timing: true,
        options: &[ScanOption {
            label: "Custom flags",
            requires_root: false,
            flags: FlagSpec::FreeForm {
                prompt: "Enter flags (e.g., -sS -f -D decoy1,decoy2):",
            },
        }],
    },
    ScanCategory {
        id: "quick-scans",
        title: "Quick Scans",
        prompt_timing: false,
        options: &[
            ScanOption {
                label: "Network Survey (-sn -T4)",
                requires_root: false,
                flags: FlagSpec::Fixed(&["-sn", "-T4"]),
            },
            ScanOption {
                label: "Full Audit (-A -T4)",
                requires_root: true,
                flags: FlagSpec::Fixed(&["-A", "-T4"]),
            },
        ],
    },
];

/// Look a category up by identifier.
pub fn find(id: &str) -> Option<&'static ScanCategory> {
    CATALOG.iter().find(|category| category.id == id)
}

/// Serializable projection of the catalog for machine-readable listings.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySummary {
    pub id: &'static str,
    pub title: &'static str,
    pub prompt_timing: bool,
    pub options: Vec<&'static str>,
}

pub fn summaries() -> Vec<CategorySummary> {
    CATALOG
        .iter()
        .map(|category| CategorySummary {
            id: category.id,
            title: category.title,
            prompt_timing: category.prompt_timing,
            options: category.options.iter().map(|opt| opt.label).collect(),
        })
        .collect()
}
