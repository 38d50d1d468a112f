//! SQL Server query runner over TDS

use async_trait::async_trait;
use tiberius::{Client, ColumnData, Config, FromSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

use crate::error::{Error, Result};
use crate::types::{CellValue, QueryTable};

use super::{QueryError, QueryRunner};

type TdsClient = Client<Compat<TcpStream>>;

/// Runs statements against SQL Server, one TCP connection per call
pub struct MssqlRunner {
    config: Config,
}

impl MssqlRunner {
    /// Parse an ADO.NET connection string such as
    /// `server=tcp:localhost,1433;database=inventory;IntegratedSecurity=true`
    pub fn new(connection_string: &str) -> Result<Self> {
        let config = Config::from_ado_string(connection_string)
            .map_err(|e| Error::Config(format!("Invalid SQL Server connection string: {}", e)))?;
        Ok(Self { config })
    }

    async fn connect(&self) -> std::result::Result<TdsClient, tiberius::error::Error> {
        let tcp = TcpStream::connect(self.config.get_addr()).await?;
        tcp.set_nodelay(true)?;

        match Client::connect(self.config.clone(), tcp.compat_write()).await {
            Ok(client) => Ok(client),
            // Azure SQL may hand the login to another node
            Err(tiberius::error::Error::Routing { host, port }) => {
                let mut config = self.config.clone();
                config.host(&host);
                config.port(port);

                let tcp = TcpStream::connect(config.get_addr()).await?;
                tcp.set_nodelay(true)?;
                Client::connect(config, tcp.compat_write()).await
            }
            Err(e) => Err(e),
        }
    }
}

fn text_of<'a, T>(data: &'a ColumnData<'static>) -> CellValue
where
    T: FromSql<'a> + ToString,
{
    match T::from_sql(data) {
        Ok(Some(value)) => CellValue::Text(value.to_string()),
        Ok(None) => CellValue::Null,
        Err(e) => CellValue::Text(format!("<{}>", e)),
    }
}

fn cell_from(data: &ColumnData<'static>) -> CellValue {
    match data {
        ColumnData::U8(v) => v.map(|v| CellValue::Integer(v.into())).unwrap_or(CellValue::Null),
        ColumnData::I16(v) => v.map(|v| CellValue::Integer(v.into())).unwrap_or(CellValue::Null),
        ColumnData::I32(v) => v.map(|v| CellValue::Integer(v.into())).unwrap_or(CellValue::Null),
        ColumnData::I64(v) => v.map(CellValue::Integer).unwrap_or(CellValue::Null),
        ColumnData::F32(v) => v.map(|v| CellValue::Real(v.into())).unwrap_or(CellValue::Null),
        ColumnData::F64(v) => v.map(CellValue::Real).unwrap_or(CellValue::Null),
        ColumnData::Bit(v) => v.map(CellValue::Bool).unwrap_or(CellValue::Null),
        ColumnData::String(v) => v
            .as_ref()
            .map(|s| CellValue::Text(s.to_string()))
            .unwrap_or(CellValue::Null),
        ColumnData::Guid(v) => v
            .as_ref()
            .map(|g| CellValue::Text(g.to_string()))
            .unwrap_or(CellValue::Null),
        ColumnData::Binary(v) => v
            .as_ref()
            .map(|b| CellValue::Blob(b.to_vec()))
            .unwrap_or(CellValue::Null),
        ColumnData::Numeric(v) => v
            .as_ref()
            .map(|n| {
                let text = n.to_string();
                text.parse()
                    .map(CellValue::Real)
                    .unwrap_or(CellValue::Text(text))
            })
            .unwrap_or(CellValue::Null),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            text_of::<chrono::NaiveDateTime>(data)
        }
        ColumnData::Date(_) => text_of::<chrono::NaiveDate>(data),
        ColumnData::Time(_) => text_of::<chrono::NaiveTime>(data),
        ColumnData::DateTimeOffset(_) => text_of::<chrono::DateTime<chrono::FixedOffset>>(data),
        ColumnData::Xml(v) => v
            .as_ref()
            .map(|x| CellValue::Text(x.to_string()))
            .unwrap_or(CellValue::Null),
    }
}

#[async_trait]
impl QueryRunner for MssqlRunner {
    async fn run(&self, sql: &str) -> std::result::Result<QueryTable, QueryError> {
        let mut client = self.connect().await.map_err(|e| {
            tracing::error!("SQL Server connection failed: {}", e);
            QueryError::Connection
        })?;

        let query_error = |e: tiberius::error::Error| QueryError::Query(e.to_string());

        let mut stream = client.simple_query(sql).await.map_err(query_error)?;
        let columns: Vec<String> = stream
            .columns()
            .await
            .map_err(query_error)?
            .map(|cols| cols.iter().map(|c| c.name().to_string()).collect())
            .unwrap_or_default();
        let rows = stream.into_first_result().await.map_err(query_error)?;

        let mut table = QueryTable::new(columns);
        for row in &rows {
            table.rows.push(row.cells().map(|(_, data)| cell_from(data)).collect());
        }

        Ok(table)
    }

    fn name(&self) -> &str {
        "mssql"
    }
}
