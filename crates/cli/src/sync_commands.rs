use {
    anyhow::Result,
    gas_config::{GlobalPaths, ProjectPaths},
    gas_drive::{DriveClient, PushSource},
    gas_oauth::{AuthOptions, Authenticator, OAuthClient},
};

async fn authenticated_client() -> Result<OAuthClient> {
    Authenticator::new(GlobalPaths::new())
        .authenticate(&AuthOptions::default())
        .await
}

pub async fn push(from_remote: bool) -> Result<()> {
    let project = ProjectPaths::new(std::env::current_dir()?);
    let project_id = project.read_project_id()?;
    let client = authenticated_client().await?;

    let source = if from_remote {
        PushSource::Remote
    } else {
        PushSource::Local
    };
    DriveClient::new()
        .push(&client, &project_id, source, &project)
        .await?;
    println!("Pushed project {project_id}.");
    Ok(())
}

pub async fn pull() -> Result<()> {
    let project = ProjectPaths::new(std::env::current_dir()?);
    let project_id = project.read_project_id()?;
    let client = authenticated_client().await?;

    DriveClient::new()
        .pull(&client, &project_id, &project)
        .await?;
    println!(
        "Pulled project {project_id} into {}.",
        project.remote_file().display()
    );
    Ok(())
}
