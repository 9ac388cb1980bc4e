use std::sync::Arc;

use ophidian::{name, Construct, ContainerBuilder, ContainerConfig, DynError, Lifetime, Named};
use tracing_subscriber::EnvFilter;

name!(Hostname = "hostname");

#[derive(Debug)]
struct Logger {
    prefix: String,
}

#[derive(Debug)]
struct Service {
    logger: Arc<Logger>,
    hostname: Named<String, Hostname>,
}
impl Construct for Service {
    type Dependencies = (Arc<Logger>, Named<String, Hostname>);

    fn construct((logger, hostname): Self::Dependencies) -> Result<Self, DynError> {
        Ok(Service { logger, hostname })
    }
}

fn main() -> Result<(), DynError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let container = ContainerBuilder::new()
        .with_config(ContainerConfig::strict())
        .add_named_instance("hostname", "localhost".to_string())
        .add_factory(Lifetime::Singleton, || Logger {
            prefix: "[demo]".to_string(),
        })
        .add_constructor::<Service>(Lifetime::Transient)
        .build()?;

    println!("{:?}", container);
    print!("{}", container.graph());

    let first = container.require::<Service>()?;
    let second = container.require::<Service>()?;
    println!(
        "{} services on {} - distinct: {}, same logger: {}",
        first.logger.prefix,
        first.hostname.as_str(),
        !Arc::ptr_eq(&first, &second),
        Arc::ptr_eq(&first.logger, &second.logger)
    );

    Ok(())
}
