use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("arbcti {}", env!("CARGO_PKG_VERSION"));
    if args.extended {
        println!("target_os: {}", std::env::consts::OS);
        println!("target_arch: {}", std::env::consts::ARCH);
        println!(
            "message_kinds: {}",
            arbcti_msg::MessageKind::ALL
                .iter()
                .map(|k| k.name())
                .collect::<Vec<_>>()
                .join(", ")
        );
    }
    Ok(SUCCESS)
}
