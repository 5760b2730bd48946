/// Expands the length specification of an `opcode_list!` entry into an [`OpcodeLength`].
///
/// `1` is a lone opcode byte, any other literal is the total encoded size of a
/// fixed push (opcode byte included) and an unsigned integer type names the
/// width of the little-endian length prefix.
macro_rules! opcode_length {
    (1) => {
        OpcodeLength::Single
    };
    (u8) => {
        OpcodeLength::Prefixed(PrefixWidth::U8)
    };
    (u16) => {
        OpcodeLength::Prefixed(PrefixWidth::U16)
    };
    (u32) => {
        OpcodeLength::Prefixed(PrefixWidth::U32)
    };
    ($length: literal) => {
        OpcodeLength::Fixed($length - 1)
    };
}

macro_rules! opcode_list {
    ( $( opcode $(|$alias:ident|)? $name:ident<$num:literal, $length:tt> $display:literal )* ) => {
        pub mod codes {
            $(
                #[allow(non_upper_case_globals)]
                #[allow(dead_code)]
                pub const $name: u8 = $num;
                $(
                    #[allow(non_upper_case_globals)]
                    #[allow(dead_code)]
                    pub const $alias: u8 = $num;
                )?
            )*
        }

        /// Every opcode definition, indexed by its byte value.
        pub static OPCODES: [Opcode; 256] = [
            $(
                Opcode { value: $num, name: $display, length: opcode_length!($length) },
            )*
        ];
    };
}
