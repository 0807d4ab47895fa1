use osplink_shell::{is_quiet, outln, Shell};

use crate::station::Station;

const LONG_HELP: &str = "\
SYNTAX: version
- lists the version of the application and the libraries it is built from
NOTES:
- supports @-prefix to print only the application version
";

pub fn register(shell: &mut Shell<Station>) -> osplink_shell::Result<usize> {
    shell.register("version", main, "version of the application and its libraries", LONG_HELP)
}

fn app_line(station: &Station) -> String {
    match &station.app {
        Some(app) => format!("{} {}", app.name, app.version),
        None => "no application version registered".to_string(),
    }
}

fn main(shell: &mut Shell<Station>, station: &mut Station, args: &[&str]) {
    if let [_, arg, ..] = args {
        outln!(shell, "ERROR: 'version' has unknown argument ('{arg}')");
        return;
    }
    if is_quiet(args) {
        outln!(shell, "{}", app_line(station));
        return;
    }

    outln!(shell, "app     : {}", app_line(station));
    outln!(
        shell,
        "runtime : {} {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    outln!(
        shell,
        "target  : {}",
        option_env!("OSPLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    outln!(shell, "frame   : {}", osplink_frame::VERSION);
    outln!(
        shell,
        "variants: {} ({} telegrams)",
        osplink_variants::VERSION,
        station.variants.named().count()
    );
    outln!(shell, "shell   : {}", osplink_shell::VERSION);
    if let Some(extra) = &station.version_extra {
        for line in extra() {
            outln!(shell, "{line}");
        }
    }
}
