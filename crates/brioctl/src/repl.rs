//! Interactive chat loop over stdin.

use crate::display;
use crate::session::SessionDriver;
use anyhow::Result;
use brio_common::{Clock, TurnInput};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run<C: Clock>(driver: &mut SessionDriver<C>, pacing: Duration) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut reply = driver.start().await;
    display::show_reply(&reply, pacing).await;

    while !reply.finished {
        display::prompt();
        let Some(line) = lines.next_line().await? else {
            // EOF: the session is simply abandoned
            println!();
            break;
        };
        reply = driver.turn(TurnInput::line(&line)).await;
        display::show_reply(&reply, pacing).await;
    }

    Ok(())
}
