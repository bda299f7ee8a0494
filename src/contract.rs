//! Soroban token contract accessor.
//!
//! Builds an `InvokeHostFunction` envelope for a read-only contract call,
//! asks the RPC node to simulate it and decodes the returned `ScVal`.
//! Nothing is signed or submitted.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stellar_xdr::curr::{
    AccountId, Hash, HostFunction, Int128Parts, InvokeContractArgs, InvokeHostFunctionOp, Limits,
    Memo, MuxedAccount, Operation, OperationBody, Preconditions, PublicKey, ReadXdr, ScAddress,
    ScSymbol, ScVal, SequenceNumber, Transaction, TransactionEnvelope, TransactionExt,
    TransactionV1Envelope, Uint256, VecM, WriteXdr,
};
use thiserror::Error;
use tracing::debug;
use url::Url;

const BALANCE_FN: &str = "balance";

/// Base fee for the simulated envelope; simulation ignores it but the XDR needs one
const SIMULATION_FEE: u32 = 100;

/// Static parameters of a contract accessor handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub contract_id: String,
    pub network_passphrase: String,
    pub rpc_url: String,
}

/// Result of a simulated contract call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedCall<T> {
    pub result: T,
    pub latest_ledger: u32,
    pub min_resource_fee: Option<String>,
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("invalid contract id '{0}'")]
    InvalidContractId(String),
    #[error("invalid account address '{0}'")]
    InvalidAccount(String),
    #[error("invalid RPC URL '{0}'")]
    InvalidUrl(String),
    #[error("RPC request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("simulation failed: {0}")]
    Simulation(String),
    #[error("simulation returned no result")]
    MissingResult,
    #[error("unexpected contract result: {0}")]
    UnexpectedResult(String),
    #[error("XDR error: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),
}

/// Read side of a SEP-41 token contract.
#[async_trait]
pub trait TokenContract: Send + Sync {
    async fn balance(&self, account: &str) -> Result<SimulatedCall<i128>, ContractError>;
}

/// One-shot client for the BDB token contract over Soroban JSON-RPC.
pub struct TokenClient {
    options: ClientOptions,
    contract: [u8; 32],
    http: reqwest::Client,
}

impl TokenClient {
    pub fn new(options: ClientOptions) -> Result<Self, ContractError> {
        let contract = stellar_strkey::Contract::from_string(options.contract_id.trim())
            .map_err(|_| ContractError::InvalidContractId(options.contract_id.clone()))?
            .0;
        Url::parse(&options.rpc_url).map_err(|_| ContractError::InvalidUrl(options.rpc_url.clone()))?;

        Ok(Self {
            options,
            contract,
            http: reqwest::Client::new(),
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Base64 XDR envelope invoking `balance(account)` on this contract.
    pub fn balance_envelope(&self, account: &str) -> Result<String, ContractError> {
        let key = parse_account(account)?;
        let address = ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key))));
        let envelope = invoke_envelope(key, self.contract, BALANCE_FN, vec![ScVal::Address(address)])?;
        Ok(envelope.to_xdr_base64(Limits::none())?)
    }

    async fn simulate(&self, transaction: String) -> Result<SimulateTransactionResult, ContractError> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: 1,
            method: "simulateTransaction",
            params: SimulateParams { transaction },
        };

        let response: RpcResponse<SimulateTransactionResult> = self
            .http
            .post(&self.options.rpc_url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match (response.result, response.error) {
            (_, Some(err)) => Err(ContractError::Rpc {
                code: err.code,
                message: err.message,
            }),
            (Some(result), None) => Ok(result),
            (None, None) => Err(ContractError::MissingResult),
        }
    }
}

#[async_trait]
impl TokenContract for TokenClient {
    async fn balance(&self, account: &str) -> Result<SimulatedCall<i128>, ContractError> {
        let transaction = self.balance_envelope(account)?;
        debug!(
            "Simulating {}({}) on {} via {}",
            BALANCE_FN, account, self.options.contract_id, self.options.rpc_url
        );
        let simulation = self.simulate(transaction).await?;
        decode_i128_result(simulation)
    }
}

fn parse_account(account: &str) -> Result<[u8; 32], ContractError> {
    stellar_strkey::ed25519::PublicKey::from_string(account.trim())
        .map(|pk| pk.0)
        .map_err(|_| ContractError::InvalidAccount(account.to_string()))
}

fn invoke_envelope(
    source: [u8; 32],
    contract: [u8; 32],
    function: &str,
    args: Vec<ScVal>,
) -> Result<TransactionEnvelope, ContractError> {
    let operation = Operation {
        source_account: None,
        body: OperationBody::InvokeHostFunction(InvokeHostFunctionOp {
            host_function: HostFunction::InvokeContract(InvokeContractArgs {
                contract_address: ScAddress::Contract(Hash(contract)),
                function_name: ScSymbol(function.as_bytes().to_vec().try_into()?),
                args: args.try_into()?,
            }),
            auth: VecM::default(),
        }),
    };

    let tx = Transaction {
        source_account: MuxedAccount::Ed25519(Uint256(source)),
        fee: SIMULATION_FEE,
        seq_num: SequenceNumber(0),
        cond: Preconditions::None,
        memo: Memo::None,
        operations: vec![operation].try_into()?,
        ext: TransactionExt::V0,
    };

    Ok(TransactionEnvelope::Tx(TransactionV1Envelope {
        tx,
        signatures: VecM::default(),
    }))
}

fn decode_i128_result(simulation: SimulateTransactionResult) -> Result<SimulatedCall<i128>, ContractError> {
    if let Some(err) = simulation.error {
        return Err(ContractError::Simulation(err));
    }
    let first = simulation.results.into_iter().next().ok_or(ContractError::MissingResult)?;
    let value = ScVal::from_xdr_base64(first.xdr.as_bytes(), Limits::none())?;

    let result = match value {
        ScVal::I128(Int128Parts { hi, lo }) => ((hi as i128) << 64) | lo as i128,
        other => return Err(ContractError::UnexpectedResult(format!("{:?}", other))),
    };

    Ok(SimulatedCall {
        result,
        latest_ledger: simulation.latest_ledger,
        min_resource_fee: simulation.min_resource_fee,
    })
}

#[derive(Serialize)]
struct RpcRequest<P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: P,
}

#[derive(Serialize)]
struct SimulateParams {
    transaction: String,
}

#[derive(Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorBody>,
}

#[derive(Deserialize)]
struct RpcErrorBody {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SimulateTransactionResult {
    #[serde(default)]
    results: Vec<SimulateHostFunctionResult>,
    error: Option<String>,
    #[serde(default)]
    latest_ledger: u32,
    min_resource_fee: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SimulateHostFunctionResult {
    xdr: String,
}
