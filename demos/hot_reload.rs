//! 热更新使用示例
//!
//! 加载 demos/config/local.ini 并开启自动重载，修改文件后可以看到新值

use iniconf::cfg::global;
use iniconf::{DefaultConfigOptions, ReloadEvent};
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    // 1. 加载默认实例（SYS_ENV 未设置时为 demos/config/local.ini）
    let options = DefaultConfigOptions {
        dir: "demos/config".to_string(),
        auto_reload: true,
        check_interval: Duration::from_secs(2),
        ..Default::default()
    };
    let config = global::init_with(&options)
        .ok_or_else(|| anyhow::anyhow!("加载 {} 失败", options.file_path().display()))?;

    // 2. 通过便捷函数读取默认实例
    println!("log_level = {}", global::get("log_level"));
    println!("db.host   = {}", global::section_get("db", "host"));
    println!("features  = {:?}", global::sections_get("features"));

    // 3. 监听重载事件
    config.on_reload(|event| match event {
        ReloadEvent::Reloaded { name, .. } => {
            println!("{} 已重载: db.host = {}", name, global::section_get("db", "host"));
        }
        ReloadEvent::Failed { name, error } => println!("{} 重载失败: {}", name, error),
    });

    println!("\n提示: 修改 demos/config/local.ini 文件查看热更新效果");
    println!("按 Ctrl+C 退出");

    std::thread::park();
    Ok(())
}
