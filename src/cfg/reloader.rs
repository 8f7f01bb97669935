//! 自动重载线程
//!
//! 每个开启自动重载的配置实例对应一个后台线程：按检查周期查询来源的修改时间，
//! 修改时间前进时触发重载。线程只持有实例的弱引用，收到停止信号、
//! 停止通道关闭或实例被释放时退出。

use crossbeam::channel::{self, Receiver, Sender};
use std::sync::Weak;
use std::thread::{self, JoinHandle};

use super::config::{Config, PollOutcome};
use super::error::{ConfigError, Result};

/// 重载线程句柄，drop 时停止线程并等待其退出
pub(crate) struct ReloadHandle {
    stop_sender: Option<Sender<()>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ReloadHandle {
    pub(crate) fn spawn(config: Weak<Config>, name: &str) -> Result<Self> {
        let (stop_tx, stop_rx) = channel::bounded(1);
        let thread_name = format!("iniconf-reload-{}", name);
        let name = name.to_string();

        let thread_handle = thread::Builder::new()
            .name(thread_name)
            .spawn(move || run(config, stop_rx, name))
            .map_err(ConfigError::Spawn)?;

        Ok(Self {
            stop_sender: Some(stop_tx),
            thread_handle: Some(thread_handle),
        })
    }
}

impl Drop for ReloadHandle {
    fn drop(&mut self) {
        if let Some(sender) = self.stop_sender.take() {
            let _ = sender.try_send(());
        }

        if let Some(handle) = self.thread_handle.take() {
            // 实例可能在重载线程内部被释放，此时不能 join 自己
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }
}

fn run(config: Weak<Config>, stop_rx: Receiver<()>, name: String) {
    log::debug!("reload thread for '{}' started", name);

    loop {
        // 每个周期重新读取检查周期，reset 修改后下一周期生效
        let interval = match config.upgrade() {
            Some(config) => config.check_interval(),
            None => break,
        };

        crossbeam::select! {
            recv(stop_rx) -> _ => break,
            default(interval) => {
                let Some(config) = config.upgrade() else {
                    break;
                };
                if let PollOutcome::ReloadFailed = config.reload_if_modified() {
                    log::warn!("config '{}' keeps previous snapshot", name);
                }
            }
        }
    }

    log::debug!("reload thread for '{}' stopped", name);
}
