use osplink::variants::VariantRegistry;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs, variants: &VariantRegistry) -> CliResult<i32> {
    if !args.extended {
        println!("osplink {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: osplink");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!(
        "target: {}",
        option_env!("OSPLINK_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("OSPLINK_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("osplink-frame: {}", osplink::frame::VERSION);
    println!("osplink-variants: {}", osplink::variants::VERSION);
    println!("osplink-shell: {}", osplink::shell::VERSION);
    println!("osplink-transport: {}", osplink::transport::VERSION);
    println!("telegrams: {}", variants.len());
    println!("features: cli=true");

    Ok(SUCCESS)
}
