//! Remote lamp and ventilation control.
//!
//! The network server parses command lines and queues them; the dispatcher
//! task here applies each one through the shared [`PeripheralFacade`] and
//! answers with the acknowledgement text, or `ERR <reason>` when the output
//! write fails. Remote commands never touch the latch.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use doorward_hardware::{LockActuator, OutputPin, PeripheralFacade};
use doorward_network::{CommandRequest, RemoteCommand, RemoteServer, RemoteServerConfig};

use crate::{ControllerError, Result};

/// Depth of the queue between the server and the dispatcher.
const REQUEST_QUEUE_DEPTH: usize = 32;

/// Apply one command and build the reply line.
pub async fn dispatch<A, P>(facade: &PeripheralFacade<A, P>, command: RemoteCommand) -> String
where
    A: LockActuator,
    P: OutputPin,
{
    let result = if command.is_lamp() {
        facade.set_lamp(command.level()).await
    } else {
        facade.set_ventilation(command.level()).await
    };

    match result {
        Ok(()) => {
            info!(command = command.as_str(), "remote command applied");
            command.ack().to_string()
        }
        Err(e) => {
            warn!(command = command.as_str(), error = %e, "remote command failed");
            format!("ERR {e}")
        }
    }
}

/// Answer requests until every sender is gone.
pub async fn run_dispatcher<A, P>(
    facade: Arc<PeripheralFacade<A, P>>,
    mut requests: mpsc::Receiver<CommandRequest>,
) where
    A: LockActuator,
    P: OutputPin,
{
    while let Some(request) = requests.recv().await {
        let reply = dispatch(&facade, request.command()).await;
        request.respond(reply);
    }
    info!("remote dispatcher stopped");
}

/// Running remote-control server and dispatcher.
pub struct RemoteControl {
    local_addr: SocketAddr,
    server: JoinHandle<doorward_network::Result<()>>,
    dispatcher: JoinHandle<()>,
}

impl RemoteControl {
    /// Bind the server and spawn it together with the dispatcher.
    pub async fn start<A, P>(
        config: RemoteServerConfig,
        facade: Arc<PeripheralFacade<A, P>>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self>
    where
        A: LockActuator + 'static,
        P: OutputPin + 'static,
    {
        let (requests_tx, requests_rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
        let server = RemoteServer::bind(config, requests_tx).await?;
        let local_addr = server.local_addr()?;

        let dispatcher = tokio::spawn(run_dispatcher(facade, requests_rx));
        let server = tokio::spawn(server.run(shutdown));

        Ok(Self {
            local_addr,
            server,
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the server to stop, then for the dispatcher to drain.
    pub async fn join(self) -> Result<()> {
        let served = self
            .server
            .await
            .map_err(|e| ControllerError::Io(std::io::Error::other(e)))?;
        if let Err(e) = self.dispatcher.await {
            warn!(error = %e, "remote dispatcher task failed");
        }
        served.map_err(ControllerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorward_hardware::mock::{MockActuator, MockPin};
    use rstest::rstest;

    #[rstest]
    #[case(RemoteCommand::LampOn, "LED turned ON", true, false)]
    #[case(RemoteCommand::LampOff, "LED turned OFF", false, false)]
    #[case(RemoteCommand::FanOn, "Fan turned ON", false, true)]
    #[case(RemoteCommand::FanOff, "Fan turned OFF", false, false)]
    #[tokio::test]
    async fn test_dispatch_acknowledges(
        #[case] command: RemoteCommand,
        #[case] ack: &str,
        #[case] lamp: bool,
        #[case] fan: bool,
    ) {
        let (servo, _) = MockActuator::new();
        let (lamp_pin, lamp_probe) = MockPin::new("lamp");
        let (fan_pin, fan_probe) = MockPin::new("fan");
        let facade = PeripheralFacade::new(servo, lamp_pin, fan_pin);

        assert_eq!(dispatch(&facade, command).await, ack);
        assert_eq!(lamp_probe.level(), lamp);
        assert_eq!(fan_probe.level(), fan);
    }

    #[tokio::test]
    async fn test_dispatch_reports_failure() {
        let (servo, _) = MockActuator::new();
        let (lamp_pin, lamp_probe) = MockPin::new("lamp");
        let (fan_pin, _) = MockPin::new("fan");
        let facade = PeripheralFacade::new(servo, lamp_pin, fan_pin);

        lamp_probe.set_failing(true);
        let reply = dispatch(&facade, RemoteCommand::LampOn).await;

        assert!(reply.starts_with("ERR "));
        assert!(!facade.outputs().lamp);
    }
}
