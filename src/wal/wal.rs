use crate::models::user::{PageIdSet, UserId};
use anyhow::{anyhow, bail, Context, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// WAL operation types
///
/// `SetPageIds` carries the resulting field value, so replaying a log twice
/// ends in the same state.
#[derive(Debug, Clone, PartialEq)]
pub enum WalOperation {
    CreateUser {
        id: UserId,
        email: String,
        password_hash: String,
        created_at: i64,
    },
    SetPageIds {
        id: UserId,
        page_ids: PageIdSet,
        updated_at: i64,
    },
    CreatePage {
        id: String,
        address: String,
        owner: UserId,
        created_at: i64,
    },
    RenamePage {
        current: String,
        new: String,
    },
    DeletePage {
        id: String,
    },
}

impl WalOperation {
    fn to_line(&self) -> String {
        match self {
            WalOperation::CreateUser {
                id,
                email,
                password_hash,
                created_at,
            } => {
                format!(
                    "CREATE_USER|{}|{}|{}|{}",
                    id,
                    hex::encode(email),
                    hex::encode(password_hash),
                    created_at
                )
            }
            WalOperation::SetPageIds {
                id,
                page_ids,
                updated_at,
            } => {
                let encoded: Vec<String> = page_ids.iter().map(hex::encode).collect();
                format!("SET_PAGE_IDS|{}|{}|{}", id, encoded.join(","), updated_at)
            }
            WalOperation::CreatePage {
                id,
                address,
                owner,
                created_at,
            } => {
                format!(
                    "CREATE_PAGE|{}|{}|{}|{}",
                    hex::encode(id),
                    hex::encode(address),
                    owner,
                    created_at
                )
            }
            WalOperation::RenamePage { current, new } => {
                format!("RENAME_PAGE|{}|{}", hex::encode(current), hex::encode(new))
            }
            WalOperation::DeletePage { id } => format!("DELETE_PAGE|{}", hex::encode(id)),
        }
    }

    fn from_line(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split('|').collect();

        match parts.first() {
            Some(&"CREATE_USER") => {
                if parts.len() != 5 {
                    bail!("Invalid CREATE_USER format");
                }
                let id = parts[1].parse::<UserId>().context("Invalid user ID")?;
                let email = decode_string(parts[2]).context("Invalid email hex")?;
                let password_hash = decode_string(parts[3]).context("Invalid password hash hex")?;
                let created_at = parts[4].parse::<i64>().context("Invalid created_at")?;

                Ok(WalOperation::CreateUser {
                    id,
                    email,
                    password_hash,
                    created_at,
                })
            }
            Some(&"SET_PAGE_IDS") => {
                if parts.len() != 4 {
                    bail!("Invalid SET_PAGE_IDS format");
                }
                let id = parts[1].parse::<UserId>().context("Invalid user ID")?;
                let page_ids = parts[2]
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(decode_string)
                    .collect::<Result<PageIdSet>>()
                    .context("Invalid page id hex")?;
                let updated_at = parts[3].parse::<i64>().context("Invalid updated_at")?;

                Ok(WalOperation::SetPageIds {
                    id,
                    page_ids,
                    updated_at,
                })
            }
            Some(&"CREATE_PAGE") => {
                if parts.len() != 5 {
                    bail!("Invalid CREATE_PAGE format");
                }
                let id = decode_string(parts[1]).context("Invalid page id hex")?;
                let address = decode_string(parts[2]).context("Invalid address hex")?;
                let owner = parts[3].parse::<UserId>().context("Invalid owner ID")?;
                let created_at = parts[4].parse::<i64>().context("Invalid created_at")?;

                Ok(WalOperation::CreatePage {
                    id,
                    address,
                    owner,
                    created_at,
                })
            }
            Some(&"RENAME_PAGE") => {
                if parts.len() != 3 {
                    bail!("Invalid RENAME_PAGE format");
                }
                Ok(WalOperation::RenamePage {
                    current: decode_string(parts[1]).context("Invalid page id hex")?,
                    new: decode_string(parts[2]).context("Invalid page id hex")?,
                })
            }
            Some(&"DELETE_PAGE") => {
                if parts.len() != 2 {
                    bail!("Invalid DELETE_PAGE format");
                }
                Ok(WalOperation::DeletePage {
                    id: decode_string(parts[1]).context("Invalid page id hex")?,
                })
            }
            _ => bail!("Unknown operation type"),
        }
    }
}

fn decode_string(field: &str) -> Result<String> {
    let bytes = hex::decode(field)?;
    String::from_utf8(bytes).context("Field is not valid UTF-8")
}

pub struct Wal {
    file: Arc<Mutex<File>>,
    path: PathBuf,
}

impl Wal {
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .context("Failed to open WAL file")?;

        Ok(Wal {
            file: Arc::new(Mutex::new(file)),
            path,
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Append and flush one operation. Returns only after the line is written.
    pub fn log_operation(&self, op: &WalOperation) -> Result<()> {
        let line = op.to_line();
        let mut file = self
            .file
            .lock()
            .map_err(|_| anyhow!("WAL lock poisoned"))?;
        writeln!(file, "{}", line).context("Failed to write to WAL")?;
        file.flush().context("Failed to flush WAL")?;
        Ok(())
    }

    pub fn replay(&self) -> Result<Vec<WalOperation>> {
        let file = File::open(&self.path).context("Failed to open WAL for replay")?;
        let reader = BufReader::new(file);
        let mut operations = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result.context("Failed to read line from WAL")?;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match WalOperation::from_line(line) {
                Ok(op) => operations.push(op),
                Err(e) => {
                    tracing::warn!(
                        line_num = line_num + 1,
                        error = %e,
                        "Failed to parse WAL line, skipping"
                    );
                }
            }
        }

        Ok(operations)
    }
}
