fn main() {
    println!("cargo:rerun-if-env-changed=VEC3_BUILD_DATE");

    let date = std::env::var("VEC3_BUILD_DATE").unwrap_or_else(|_| {
        let now = time::OffsetDateTime::now_utc();
        time::format_description::parse("[year]-[month]-[day]")
            .ok()
            .and_then(|fmt| now.format(&fmt).ok())
            .unwrap_or_else(|| "unknown".to_string())
    });

    println!("cargo:rustc-env=VEC3_BUILD_DATE={}", date);
}
