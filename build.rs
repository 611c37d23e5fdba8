use chrono::Utc;

fn main() {
    // 构建时间，供启动日志与 /api/health 使用
    let now = Utc::now();
    println!("cargo:rustc-env=BUILD_TIME={}", now.format("%Y-%m-%d %H:%M:%S UTC"));

    println!("cargo:rerun-if-changed=build.rs");
}
