mod container_property_tests;
