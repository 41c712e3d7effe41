//! 原生合约：合约地址、方法名、调用参数与统一的调用入口。

pub mod asset;
pub mod governance;
pub mod identity;
pub mod invoke;
pub mod relayer;
pub mod side_chain;

pub use invoke::{GasSettings, InvokeError, SignerPolicy, invoke_native, invoke_with_multi_sign};

/// 原生合约调用载荷版本。
pub const NATIVE_INVOKE_VERSION: u8 = 0;

/// 主链原生合约地址。
pub mod contracts {
    use crate::account::Address;

    pub const ONT: Address = Address::native(0x01);
    pub const ONG: Address = Address::native(0x02);
    pub const ONT_ID: Address = Address::native(0x03);
    pub const AUTH: Address = Address::native(0x06);
    pub const GOVERNANCE: Address = Address::native(0x07);
}

/// 中继链原生合约地址，与主链地址空间相互独立。
pub mod relay_contracts {
    use crate::account::Address;

    pub const HEADER_SYNC: Address = Address::native(0x01);
    pub const CROSS_CHAIN_MANAGER: Address = Address::native(0x02);
    pub const SIDE_CHAIN_MANAGER: Address = Address::native(0x03);
    pub const NODE_MANAGER: Address = Address::native(0x04);
    pub const RELAYER_MANAGER: Address = Address::native(0x05);
}

use crate::account::Address;
use crate::codec::Sink;

/// 以 ONT ID 形式表示账户：`did:ont:<base58 地址>`。
pub fn ont_id_of(address: &Address) -> Vec<u8> {
    format!("did:ont:{}", address.to_base58()).into_bytes()
}

pub(crate) fn write_string_list(sink: &mut Sink, items: &[String]) {
    sink.write_var_uint(items.len() as u64);
    for item in items {
        sink.write_string(item);
    }
}

pub(crate) fn write_var_u32_list(sink: &mut Sink, items: &[u32]) {
    sink.write_var_uint(items.len() as u64);
    for item in items {
        sink.write_var_uint(u64::from(*item));
    }
}
