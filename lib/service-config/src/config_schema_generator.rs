use schemars::schema_for;
use user_service_config::UserServiceConfig;

fn main() {
    let schema = schema_for!(UserServiceConfig);

    match serde_json::to_string_pretty(&schema) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to serialize the configuration schema: {err}");
            std::process::exit(1);
        }
    }
}
