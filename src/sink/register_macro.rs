macro_rules! register_sinks {
    (
        $(
            $module:ident => $sink_type:ident
        ),* $(,)?
    ) => {
        $(
            pub mod $module;
            pub use $module::$sink_type;
        )*

        /// Constructor for every built-in sink, keyed by its flag name.
        pub fn all_factories() -> HashMap<&'static str, fn() -> SharedSink> {
            let mut map: HashMap<&'static str, fn() -> SharedSink> = HashMap::new();
            $(
                map.insert(stringify!($module), || Arc::new($sink_type::new()));
            )*
            map
        }

        pub const SINK_NAMES: &[&'static str] = &[
            $(stringify!($module),)*
        ];
    };
}
