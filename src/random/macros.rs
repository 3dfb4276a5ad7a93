/// Use this to define a unique type which will be used as a key to retrieve
/// an independent random stream from a `RandomSource`.
///
/// ```
/// use epiwave::define_rng;
/// use epiwave::random::RandomSource;
///
/// define_rng!(ContactRng);
///
/// let mut random = RandomSource::new(42);
/// let value: u32 = random.sample_range(ContactRng, 0..10);
/// assert!(value < 10);
/// ```
#[macro_export]
macro_rules! define_rng {
    ($vis:vis $random_id:ident) => {
        #[derive(Copy, Clone, Debug)]
        $vis struct $random_id;

        impl $crate::random::RngId for $random_id {
            fn get_name() -> &'static str {
                stringify!($random_id)
            }
        }

        // This ensures that you can't define two RngIds with the same name
        $crate::paste::paste! {
            #[doc(hidden)]
            #[no_mangle]
            #[allow(non_upper_case_globals)]
            pub static [<rng_name_duplication_guard_ $random_id>]: () = ();
        }
    };
}
pub use define_rng;
