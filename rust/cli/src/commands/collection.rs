use std::io::Write;

use clap::Args;
use seekdb::SeekdbClient;
use serde::Serialize;

use crate::CliError;

#[derive(Args, Debug)]
pub struct CreateCollectionArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long, help = "Width of the embedding vectors")]
    pub dimension: u32,
}

#[derive(Args, Debug)]
pub struct CollectionNameArgs {
    #[arg(long)]
    pub name: String,
}

#[derive(Serialize)]
struct CreatedCollection<'a> {
    name: &'a str,
    dimension: u32,
    table: String,
}

pub async fn create_collection<W: Write>(
    out: &mut W,
    client: &mut SeekdbClient,
    args: CreateCollectionArgs,
) -> Result<(), CliError> {
    let collection = client.create_collection(&args.name, args.dimension).await?;
    let created = CreatedCollection {
        name: collection.name(),
        dimension: collection.dimension(),
        table: collection.table_name(),
    };
    serde_json::to_writer(&mut *out, &created)?;
    writeln!(out)?;
    Ok(())
}

pub async fn list_collections<W: Write>(
    out: &mut W,
    client: &mut SeekdbClient,
) -> Result<(), CliError> {
    for name in client.list_collections().await? {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

pub async fn describe_collection<W: Write>(
    out: &mut W,
    client: &mut SeekdbClient,
    args: CollectionNameArgs,
) -> Result<(), CliError> {
    for column in client.collection_columns(&args.name).await? {
        writeln!(out, "{column}")?;
    }
    Ok(())
}

pub async fn delete_collection<W: Write>(
    out: &mut W,
    client: &mut SeekdbClient,
    args: CollectionNameArgs,
) -> Result<(), CliError> {
    client.delete_collection(&args.name).await?;
    writeln!(out, "Deleted collection {}", args.name)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seekdb::ClientOptions;

    fn output(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn test_collection_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = seekdb::client(ClientOptions::embedded(dir.path())).unwrap();

        let mut out = Vec::new();
        create_collection(
            &mut out,
            &mut client,
            CreateCollectionArgs {
                name: "docs".to_string(),
                dimension: 8,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            output(out),
            "{\"name\":\"docs\",\"dimension\":8,\"table\":\"c$v1docs\"}\n"
        );

        let mut out = Vec::new();
        list_collections(&mut out, &mut client).await.unwrap();
        assert_eq!(output(out), "docs\n");

        let mut out = Vec::new();
        describe_collection(
            &mut out,
            &mut client,
            CollectionNameArgs {
                name: "docs".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(output(out), "_id\ndocument\nembedding\nmetadata\n");

        let mut out = Vec::new();
        delete_collection(
            &mut out,
            &mut client,
            CollectionNameArgs {
                name: "docs".to_string(),
            },
        )
        .await
        .unwrap();
        assert_eq!(output(out), "Deleted collection docs\n");

        let mut out = Vec::new();
        list_collections(&mut out, &mut client).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_zero_dimension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut client = seekdb::client(ClientOptions::embedded(dir.path())).unwrap();
        let mut out = Vec::new();
        let err = create_collection(
            &mut out,
            &mut client,
            CreateCollectionArgs {
                name: "docs".to_string(),
                dimension: 0,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CliError::Client(_)));
        assert!(!client.is_connected());
    }
}
