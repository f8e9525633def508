// build.rs

use std::env;

fn main() -> anyhow::Result<()> {
    // Necessary because of this issue: https://github.com/rust-lang/cargo/issues/9641
    // see also https://github.com/rust-lang/cargo/issues/9554

    if env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::build::CfgArgs::output_propagated("ESP_IDF")?;
        embuild::build::LinkArgs::output_propagated("ESP_IDF")?;
    }

    let wifi_ssid = env::var("WIFI_SSID").unwrap_or_default();
    let wifi_pass = env::var("WIFI_PASS").unwrap_or_else(|_| "password".into());
    let hs_host = env::var("HS_HOST").unwrap_or_else(|_| "homeseer.local".into());
    let hs_port = env::var("HS_PORT").unwrap_or_else(|_| "80".into());

    println!("cargo:rustc-env=WIFI_SSID={wifi_ssid}");
    println!("cargo:rustc-env=WIFI_PASS={wifi_pass}");
    println!("cargo:rustc-env=HS_HOST={hs_host}");
    println!("cargo:rustc-env=HS_PORT={hs_port}");

    Ok(())
}

// EOF
