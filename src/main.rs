/*!
 * Process Scheduler Simulator - Host
 *
 * Single scheduling loop that:
 * - Reads commands from stdin, one per line
 * - Drains runner events on a fixed tick
 * - Writes responses and notifications to stdout as JSON lines
 */

use anyhow::Context;
use procsched::console::execute_line;
use procsched::{init_tracing, Response, Scheduler, SchedulerConfig};
use serde::Serialize;
use std::io::BufRead;
use std::thread;
use tracing::{error, info, warn};

fn emit<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(line) => println!("{}", line),
        Err(e) => error!(error = %e, "Failed to serialize output"),
    }
}

/// Forward stdin lines from a blocking reader thread into the async loop
fn spawn_stdin_reader() -> anyhow::Result<flume::Receiver<String>> {
    let (tx, rx) = flume::unbounded();
    thread::Builder::new()
        .name("stdin-reader".into())
        .spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to read stdin");
                        break;
                    }
                }
            }
        })
        .context("Failed to spawn stdin reader")?;
    Ok(rx)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = SchedulerConfig::from_env().context("Invalid PROCSCHED_* configuration")?;
    info!(
        max_running = config.max_running,
        policy = %config.policy,
        tick_ms = config.tick_interval.as_millis() as u64,
        "Process scheduler starting"
    );

    let mut ticker = tokio::time::interval(config.tick_interval);
    let mut scheduler = Scheduler::with_config(config);
    let notifications = scheduler.subscribe();
    let commands = spawn_stdin_reader()?;
    let mut input_closed = false;
    let shutdown_signal = tokio::signal::ctrl_c();
    tokio::pin!(shutdown_signal);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                scheduler.drain_events();
                if input_closed && scheduler.all_completed() {
                    info!("Input closed and all jobs completed");
                    break;
                }
            }
            line = commands.recv_async(), if !input_closed => {
                let Ok(line) = line else {
                    info!("Input closed, waiting for remaining jobs");
                    input_closed = true;
                    continue;
                };
                if line.trim().is_empty() {
                    continue;
                }

                let mut quit = false;
                for result in execute_line(&line, &mut scheduler) {
                    match result {
                        Ok(response) => {
                            quit |= response == Response::Bye;
                            emit(&response);
                        }
                        Err(e) => {
                            warn!(error = %e, "Command rejected");
                            emit(&serde_json::json!({ "error": e }));
                        }
                    }
                }
                if quit {
                    break;
                }
            }
            _ = &mut shutdown_signal => {
                info!("Interrupted");
                break;
            }
        }

        for notification in notifications.try_iter() {
            emit(&notification);
        }
    }

    scheduler.shutdown();
    for notification in notifications.try_iter() {
        emit(&notification);
    }
    Ok(())
}
