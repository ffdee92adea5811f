//! CLI subcommand handlers.
//!
//! Each handler runs one core operation against the node the executor is
//! bound to and prints the result, human-readable or JSON.

use std::path::Path;

use nodetls_certs::{
    compare, CertConfig, CertLocation, CertVerifier, CertsError, ClientCertDeployer,
    ClientCertFiles, CloudProvider, RemoteExecutor, RootCertRotator, ServerCertDeployer,
    ServerCertFiles,
};
use serde_json::json;

use crate::config::Command;
use crate::format;

/// Shared inputs for every handler.
pub struct Context<'a> {
    pub executor: &'a dyn RemoteExecutor,
    pub config: &'a CertConfig,
    pub provider: &'a dyn CloudProvider,
    pub json: bool,
}

pub fn dispatch(ctx: &Context<'_>, command: &Command) -> Result<(), CertsError> {
    match command {
        Command::Compare { a, b } => compare_bundles(ctx, a, b),
        Command::Verify {
            root,
            cert,
            hostname,
        } => verify(ctx, root, cert, *hostname),
        Command::AppendRoot {
            root,
            location,
            certs_dir,
        } => append_root(ctx, root, *location, certs_dir),
        Command::RemoveRoot { certs_dir } => remove_root(ctx, certs_dir),
        Command::DeployServer {
            root,
            cert,
            key,
            location,
            certs_dir,
            rotate,
        } => deploy_server(
            ctx,
            &ServerCertFiles {
                root_cert: root,
                server_cert: cert,
                server_key: key,
            },
            *location,
            certs_dir,
            *rotate,
        ),
        Command::DeployClient {
            root,
            cert,
            key,
            location,
        } => deploy_client(
            ctx,
            &ClientCertFiles {
                root_cert: root,
                client_cert: cert,
                client_key: key,
            },
            *location,
        ),
    }
}

fn read_local(path: &Path) -> Result<String, CertsError> {
    std::fs::read_to_string(path).map_err(|source| CertsError::LocalRead {
        path: path.to_path_buf(),
        source,
    })
}

fn compare_bundles(ctx: &Context<'_>, a: &Path, b: &Path) -> Result<(), CertsError> {
    let relation = compare(&read_local(a)?, &read_local(b)?)?;
    if ctx.json {
        format::ok(&json!({ "relation": relation }));
    } else {
        format::relation(a, b, relation);
    }
    Ok(())
}

fn verify(ctx: &Context<'_>, root: &str, cert: &str, hostname: bool) -> Result<(), CertsError> {
    let outcome = CertVerifier::new(ctx.config).verify(ctx.executor, root, cert, hostname)?;
    if ctx.json {
        format::ok(&outcome);
    } else {
        format::verify_outcome(ctx.executor.host(), cert, &outcome);
    }
    Ok(())
}

fn append_root(
    ctx: &Context<'_>,
    root: &str,
    location: CertLocation,
    certs_dir: &str,
) -> Result<(), CertsError> {
    RootCertRotator::new(ctx.config).append_new_root(ctx.executor, root, location, certs_dir)?;
    if ctx.json {
        format::ok(&json!({ "appended": root, "certs_dir": certs_dir }));
    } else {
        println!("Staged {root} and appended it to the trust store in {certs_dir}");
    }
    Ok(())
}

fn remove_root(ctx: &Context<'_>, certs_dir: &str) -> Result<(), CertsError> {
    let removal = RootCertRotator::new(ctx.config).remove_old_root(ctx.executor, certs_dir)?;
    if ctx.json {
        format::ok(&json!({ "removal": removal, "certs_dir": certs_dir }));
    } else {
        format::removal(certs_dir, removal);
    }
    Ok(())
}

fn deploy_server(
    ctx: &Context<'_>,
    files: &ServerCertFiles<'_>,
    location: CertLocation,
    certs_dir: &str,
    rotate: bool,
) -> Result<(), CertsError> {
    let report = ServerCertDeployer::new(ctx.config, ctx.provider).deploy(
        ctx.executor,
        files,
        location,
        certs_dir,
        rotate,
    )?;
    if ctx.json {
        format::ok(&report);
    } else {
        format::server_report(&report);
    }
    Ok(())
}

fn deploy_client(
    ctx: &Context<'_>,
    files: &ClientCertFiles<'_>,
    location: CertLocation,
) -> Result<(), CertsError> {
    let target =
        ClientCertDeployer::new(ctx.config, ctx.provider).deploy(ctx.executor, files, location)?;
    if ctx.json {
        format::ok(&json!({
            "dir": target.dir,
            "root_cert": target.root_cert,
            "client_cert": target.client_cert,
            "client_key": target.client_key,
        }));
    } else {
        println!("Client certs installed in {}", target.dir);
    }
    Ok(())
}
